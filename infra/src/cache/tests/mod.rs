mod create_store_tests;
