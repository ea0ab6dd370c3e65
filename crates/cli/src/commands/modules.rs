use crate::commands::Context;

pub fn handle_modules_command(context: &Context) {
    if context.modules.is_empty() {
        println!("No modules registered");
        return;
    }

    for module in context.modules.iter() {
        println!("{}  {:<14} {}", module.uuid(), module.name(), module.domain());
    }
}
