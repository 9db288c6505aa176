pub mod pinata_client;
pub mod pinning_interface;

pub use pinata_client::PinataClient;
pub use pinning_interface::{PinFile, PinRequest, PinningCredentials, PinningError, PinningService};

#[cfg(test)]
pub use pinning_interface::MockPinningService;
