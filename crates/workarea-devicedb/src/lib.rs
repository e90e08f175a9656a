pub mod error;
pub mod manager;
pub mod model;
pub mod traits;

pub use error::{DeviceError, DeviceResult};
pub use manager::DeviceManager;
pub use model::{AxisProfile, BuildVolume, DeviceProfile};
pub use traits::{AxisSpeeds, MachineProfileProvider};
