//! Argument quoting for the elevated shell line
//!
//! The command runs as `sh -c "<tool> <args>"`, so arguments have to survive
//! one round of shell word splitting. Only arguments containing a space are
//! wrapped in single quotes; everything else passes through untouched.
//!
//! This is not a general shell escaper. Embedded single quotes, backslashes,
//! `$`, `;` and other metacharacters are NOT escaped. Addresses and fixed tool
//! keywords never contain them, but any new caller that forwards free-form
//! user text through here must sanitize it first.

/// Join `args` into a single shell fragment, quoting arguments that contain a space
pub fn quote_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| quote_arg(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_arg(arg: &str) -> String {
    if arg.contains(' ') {
        format!("'{}'", arg)
    } else {
        arg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal splitter: spaces separate words except inside single quotes
    fn split_unquoted(line: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut has_word = false;

        for c in line.chars() {
            match c {
                '\'' => {
                    in_quotes = !in_quotes;
                    has_word = true;
                }
                ' ' if !in_quotes => {
                    if has_word {
                        words.push(std::mem::take(&mut current));
                        has_word = false;
                    }
                }
                _ => {
                    current.push(c);
                    has_word = true;
                }
            }
        }
        if has_word {
            words.push(current);
        }
        words
    }

    #[test]
    fn test_plain_args_pass_through() {
        assert_eq!(
            quote_args(&["address", "add", "10.0.0.1/32", "dev", "lo"]),
            "address add 10.0.0.1/32 dev lo"
        );
    }

    #[test]
    fn test_args_with_spaces_are_quoted() {
        assert_eq!(quote_args(&["-c", "echo hello world"]), "-c 'echo hello world'");
        assert_eq!(quote_args(&[" "]), "' '");
    }

    #[test]
    fn test_empty_list() {
        let empty: [&str; 0] = [];
        assert_eq!(quote_args(&empty), "");
    }

    #[test]
    fn test_metacharacters_not_escaped() {
        // Only spaces trigger quoting
        assert_eq!(quote_args(&["a;b", "$HOME", "x\\y"]), "a;b $HOME x\\y");
        assert_eq!(quote_args(&["it's here"]), "'it's here'");
    }

    #[test]
    fn test_boundaries_recovered_after_split() {
        let cases: Vec<Vec<&str>> = vec![
            vec!["address", "del", "10.1.1.5/32", "dev", "lo"],
            vec!["one arg with spaces", "two", "three more"],
            vec!["-c", "1", "-w", "1", "203.0.113.1"],
            vec!["trailing ", " leading", "mid dle"],
        ];

        for args in cases {
            let line = quote_args(&args);
            let expected: Vec<String> = args.iter().map(|s| s.to_string()).collect();
            assert_eq!(split_unquoted(&line), expected, "line: {}", line);
        }
    }
}
