mod path_traversal_tests;
mod redos_tests;
mod symlink_tests;
