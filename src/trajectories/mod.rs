pub mod kinematic;

pub use kinematic::{
    flight_limit, has_arrived, plane_crossing_time, position_at, spin_angle_at, spin_axis_vector,
    PitchTrajectory,
};

pub trait Trajectory<P, V> {
    fn get_position(&self, t: f64) -> P;
    fn get_velocity(&self, t: f64) -> V;
    fn get_acceleration(&self, t: f64) -> V;
    fn get_total_runtime(&self) -> f64;
    fn get_final_destination(&self) -> P {
        self.get_position(self.get_total_runtime())
    }
}
