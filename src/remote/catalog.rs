pub mod template_index;
