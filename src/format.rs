//! Column-aware text helpers shared by the fragment generators.

fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Greedily packs `items` into lines whose running estimate (item width + 2
/// per item) stays within `budget`. An item wider than the budget gets a
/// line of its own; no line is ever empty.
pub fn pack_into_lines<S: AsRef<str>>(items: &[S], budget: usize) -> Vec<Vec<&str>> {
    let mut lines = Vec::new();
    let mut line: Vec<&str> = Vec::new();
    let mut estimate = 0usize;
    for item in items {
        let item = item.as_ref();
        estimate += text_width(item) + 2;
        if estimate > budget && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            estimate = text_width(item) + 2;
        }
        line.push(item);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Packs `items`, indents every line and separates lines with `",\n"`.
/// The indent is not part of the packing estimate.
pub fn render_wrapped_list<S: AsRef<str>>(items: &[S], indent: usize, budget: usize) -> String {
    pack_into_lines(items, budget)
        .iter()
        .map(|line| format!("{:indent$}{}", "", line.join(", ")))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// `"'Result Type'"` -> `"result_type"`: non-word characters dropped, the
/// remaining whitespace-separated tokens lowercased and joined with `_`.
pub fn normalize_identifier(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    kept.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Uppercase letters of a CamelCase name: `StorageClass` -> `SC`.
pub fn acronym(name: &str) -> String {
    name.chars().filter(char::is_ascii_uppercase).collect()
}

/// Renders `def <name> : <body>;` lines with all colons in one column.
pub fn aligned_cases(cases: &[(String, String)]) -> String {
    let max_len = cases.iter().map(|(name, _)| text_width(name)).max().unwrap_or(0);
    cases
        .iter()
        .map(|(name, body)| {
            let offset = max_len + 1 - text_width(name);
            format!("def {name} {:>offset$} {body};", ":")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_letter(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

// A hyphen splits a word when two letters (or `x-y-`) precede it and a
// letter follows, optionally after one more hyphen: `non-uniform` -> `non-`,
// `uniform`. `x86-64` and `a-b` stay whole.
fn hyphen_pieces(word: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    let at = |i: usize| chars.get(i).map(|&(_, c)| c);
    let letter = |i: Option<usize>| i.and_then(at).is_some_and(is_letter);

    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, &(pos, c)) in chars.iter().enumerate() {
        if c != '-' {
            continue;
        }
        let before = letter(i.checked_sub(1))
            && (letter(i.checked_sub(2))
                || (at(i.wrapping_sub(2)) == Some('-') && i >= 3 && letter(Some(i - 3))));
        let after = letter(Some(i + 1))
            && (letter(Some(i + 2)) || (at(i + 2) == Some('-') && letter(Some(i + 3))));
        if before && after {
            let end = pos + c.len_utf8();
            pieces.push(&word[start..end]);
            start = end;
        }
    }
    pieces.push(&word[start..]);
    pieces
}

/// Greedy word wrap. `width` includes the `indent` applied to every line.
/// Lines may break after an inner hyphen; words longer than a line are
/// broken.
pub fn wrap_paragraph(text: &str, width: usize, indent: usize) -> String {
    let room = width.saturating_sub(indent).max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();

    for word in text.split_whitespace() {
        for (n, piece) in hyphen_pieces(word).into_iter().enumerate() {
            let mut rest = piece.to_string();
            // Only the first piece of a word is preceded by a space.
            let mut spaced = n == 0;
            loop {
                let cur_w = text_width(&cur);
                let sep = usize::from(spaced && !cur.is_empty());
                let piece_w = text_width(&rest);
                if cur_w + sep + piece_w <= room {
                    if sep == 1 {
                        cur.push(' ');
                    }
                    cur.push_str(&rest);
                    break;
                }
                if piece_w <= room {
                    lines.push(std::mem::take(&mut cur));
                    continue;
                }
                // Overlong piece: fill what is left of the current line with its head.
                let space_left = room.saturating_sub(cur_w + sep);
                if space_left == 0 {
                    lines.push(std::mem::take(&mut cur));
                    continue;
                }
                let head: String = rest.chars().take(space_left).collect();
                let tail: String = rest.chars().skip(space_left).collect();
                if sep == 1 {
                    cur.push(' ');
                }
                cur.push_str(&head);
                lines.push(std::mem::take(&mut cur));
                rest = tail;
                spaced = false;
                if rest.is_empty() {
                    break;
                }
            }
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }

    lines
        .iter()
        .map(|l| format!("{:indent$}{l}", ""))
        .collect::<Vec<_>>()
        .join("\n")
}
