use colored::*;

pub const TOTAL_WIDTH: usize = 64;

pub fn header(msg: &str) {
    let formatted = format!("⟦ {} ⟧", msg);
    let msg_len = console::measure_text_width(&formatted);

    let dash_count = TOTAL_WIDTH.saturating_sub(msg_len);
    let left = dash_count / 2;
    let right = dash_count - left;

    println!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right).bright_black()
    );
}

pub fn status<T: AsRef<str>>(msg: T) {
    println!("{} {}", ">".bright_black(), msg.as_ref());
}

pub fn tree_head(idx: usize, name: &str) {
    println!(
        "{} {}",
        format!("[{idx}]").bright_black(),
        name.bright_green()
    );
}

pub fn as_tree_one_level(key_value_pairs: Vec<(String, ColoredString)>) {
    let key_width = key_value_pairs
        .iter()
        .map(|(k, _)| k.len())
        .max()
        .unwrap_or(0);

    for (i, (key, value)) in key_value_pairs.iter().enumerate() {
        let last = i + 1 == key_value_pairs.len();
        let branch = if last { "└─" } else { "├─" };
        println!(
            " {} {}{}{} {}",
            branch.bright_black(),
            key,
            ".".repeat(key_width.saturating_sub(key.len()) + 1)
                .bright_black(),
            ":".bright_black(),
            value
        );
    }
}
