pub mod device;
pub mod dispatch;
pub mod notification;
pub mod push;
pub mod templates;

pub use device::DeviceRegistryService;
pub use dispatch::Dispatcher;
pub use notification::NotificationService;
