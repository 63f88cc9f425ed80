pub mod config;
pub mod doctor;
pub mod guard;
pub mod navigation;
pub mod notifier;
pub mod remote;
pub mod session;
pub mod step;
pub mod storage;
#[cfg(test)]
pub(crate) mod test_support;
pub mod time;
pub mod validator;
