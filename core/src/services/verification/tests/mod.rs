mod mocks;
mod session_tests;
