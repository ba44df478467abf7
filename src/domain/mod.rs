// Domain layer - Core models

pub mod model;
