mod config_load;
mod cycle_loop;
mod step_response;
