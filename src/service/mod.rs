//! CrudService: generic CRUD using the safe SQL builder, plus request validation.

mod crud;
mod input;
mod validation;
pub use crud::CrudService;
pub use input::{CreateInput, ListQuery, UpdateInput, MAX_LIST_LIMIT};
pub use validation::RequestValidator;
