pub mod proximity_sweep;
