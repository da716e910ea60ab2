mod algebra_tests;
