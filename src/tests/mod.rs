mod bit_field_tests;
mod slot_allocator_tests;
mod handle_tests;
