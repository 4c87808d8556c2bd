use duck_script::tokenizer;

/// One description per line: number, words and argument string
pub fn describe(script: &[u8]) -> Vec<String> {
    tokenizer::lines(script)
        .enumerate()
        .map(|(i, line)| {
            let words: Vec<String> = line.words()
                .map(|word| String::from_utf8_lossy(word.as_bytes()).to_string())
                .collect();
            match line.argument() {
                Some(argument) => format!("{:>4}: {:?} {:?}", i + 1, words, String::from_utf8_lossy(argument)),
                None => format!("{:>4}: {:?}", i + 1, words),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::describe;

    #[test]
    fn test_describe() {
        let lines = describe(b"STRING Hello World\nENTER\n");
        assert_eq!(lines, vec![
            r#"   1: ["STRING", "Hello", "World"] "Hello World""#.to_string(),
            r#"   2: ["ENTER"]"#.to_string(),
        ]);
    }
}
