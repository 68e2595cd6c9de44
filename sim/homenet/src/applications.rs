//! Applications that run alongside the simulation and react to what it
//! delivers.

mod room_controller;
pub use room_controller::{DeviceStates, LightState, RoomController, ThermostatState};
