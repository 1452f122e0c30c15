use std::time::{Duration, Instant};

/// Logs how long a scope took, at debug level, when it is dropped.
pub struct Profile {
  start: Instant,
  name:  String
}

impl Profile {
  pub fn new(name: impl Into<String>) -> Self {
    Self { start: Instant::now(), name: name.into() }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn elapsed(&self) -> Duration {
    self.start.elapsed()
  }
}

impl Drop for Profile {
  fn drop(&mut self) {
    log::debug!("{} took {:.2?}", self.name, self.elapsed());
  }
}

/// Times the rest of the enclosing scope.
#[macro_export]
macro_rules! profile {
  ($name:expr) => {
    let _profile = $crate::profiling::Profile::new($name);
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_elapsed_grows() {
    let profile = Profile::new("backend call");
    std::thread::sleep(Duration::from_millis(5));
    assert_eq!(profile.name(), "backend call");
    assert!(profile.elapsed() >= Duration::from_millis(5));
  }
}
