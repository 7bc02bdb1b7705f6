//! Integration tests of the client registry, run against
//! `cosmwasm_std::testing::MockStorage` and `test_utils::MockHost`.
