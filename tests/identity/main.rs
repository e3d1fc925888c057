mod signer_test;
