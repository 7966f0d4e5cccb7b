mod analytic_tests;
mod scenario_tests;
