/// Domain layer: entities and value objects shared by every use case
pub mod entities;
pub mod value_objects;
