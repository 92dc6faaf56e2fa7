pub mod atom;
pub mod residue;
pub mod table;
pub mod topology;
pub mod trajectory;
