pub mod index_tests;
