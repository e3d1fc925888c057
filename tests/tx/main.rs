mod builder_test;
mod rlp_test;
