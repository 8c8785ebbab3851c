use std::io::{self, BufRead, Write};

/// Ask a yes/no question on stdout and read the answer from `input`.
/// End of input counts as the default, or "no" when there is none.
pub fn prompt_confirm<R: BufRead>(
    input: &mut R,
    prompt: &str,
    default: Option<bool>,
) -> io::Result<bool> {
    let mut answer = String::new();

    loop {
        answer.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if input.read_line(&mut answer)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match parse_answer(&answer) {
            Some(yes) => return Ok(yes),
            None if answer.trim().is_empty() => {
                if let Some(default) = default {
                    return Ok(default);
                }
            }
            None => {}
        }
    }
}

fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_uppercase().as_str() {
        "Y" | "YES" | "O" | "OUI" => Some(true),
        "N" | "NO" | "NON" => Some(false),
        _ => None,
    }
}
