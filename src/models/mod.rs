pub mod device;
pub mod event;
pub mod notification;

pub use device::{DeviceRegistration, DeviceType, PushProviderKind, RegisterDevice};
pub use event::{DeliveryAssignmentEvent, OrderStatusEvent};
pub use notification::{
    DispatchOutcome, DispatchRequest, NotificationCategory, NotificationIntent,
    NotificationRecord, ProviderDelivery,
};
