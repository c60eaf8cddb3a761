pub mod bubble_commands;
pub mod pet_commands;
pub mod settings_commands;
pub mod subtitle_commands;
