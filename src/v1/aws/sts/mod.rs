pub mod assume_role;
