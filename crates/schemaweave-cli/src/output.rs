use colored::Colorize;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Prints a labelled list, e.g. the emitted type order.
pub fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}: {}", label.cyan(), items.len());
    println!("  {}", items.join(", "));
}
