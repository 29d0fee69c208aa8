use colored::Colorize;

pub fn print_header(title: &str) {
    let width = title.len() + 6;
    let border = "─".repeat(width);
    println!();
    println!("  ╭{}╮", border.cyan());
    println!("  │   {}   │", title.bright_cyan().bold());
    println!("  ╰{}╯", border.cyan());
    println!();
}

pub fn print_section(title: &str) {
    println!();
    println!("  {} {}", "●".bright_cyan(), title.bold());
    println!("  {}", "─".repeat(40).dimmed());
}

pub fn print_kv(label: &str, value: &str) {
    println!(
        "    {} {}",
        format!("{:<16}", label).dimmed(),
        value.bright_white()
    );
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg.yellow());
}

pub fn print_dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

pub fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}

pub fn status(label: &str, ok: bool) -> String {
    if ok {
        label.green().bold().to_string()
    } else {
        label.yellow().to_string()
    }
}

pub fn severity(level: &str) -> String {
    match level {
        "critical" => level.red().bold().to_string(),
        "warning" => level.yellow().to_string(),
        _ => level.normal().to_string(),
    }
}
