pub mod draft;
pub mod shipping;
pub mod view;
