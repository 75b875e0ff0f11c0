pub mod common;
pub mod config;

pub mod lake {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod market {
    pub mod entity;
}

pub mod notify {
    pub mod error;
    pub mod port;
}

pub mod screen {
    pub mod entity;
    pub mod error;
}

#[cfg(feature = "test-utils")]
pub mod testing;
