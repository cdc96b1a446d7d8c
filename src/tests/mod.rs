mod integration_run;
