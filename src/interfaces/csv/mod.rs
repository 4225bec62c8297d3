pub mod cart_writer;
pub mod op_reader;
