pub mod soil_temperature;
pub mod water_flow;
pub mod weather_generator;

pub use soil_temperature::{SoilTemperatureSolver, SoilTemperatureStep, SurfaceConditions};
pub use water_flow::{DayDrivers, WaterFlow};
pub use weather_generator::{GeneratedDay, WeatherGenerator};
