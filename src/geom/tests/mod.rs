mod test_loft_basic;
