use super::{HEADER, SheetRow};

/// Pipes would end the cell, newlines the row.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

pub(super) fn render(rows: &[SheetRow]) -> String {
    let [_, comments, response] = HEADER;
    let mut out = format!("| | {comments} | {response} |\n");
    out.push_str("| --- | --- | --- |\n");
    for row in rows {
        match row {
            SheetRow::Heading(title) => {
                out.push_str(&format!("| | **{}** | |\n", cell(title)));
            }
            SheetRow::Item {
                label,
                text,
                comment,
            } => {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    cell(label),
                    cell(text),
                    cell(comment)
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_with_heading_and_items() {
        let rows = vec![
            SheetRow::Heading("Method comments".into()),
            SheetRow::Item {
                label: "method.1".into(),
                text: "x".into(),
                comment: "c1".into(),
            },
        ];
        assert_eq!(
            render(&rows),
            "| | Editor/Reviewer Comments | Response |\n\
             | --- | --- | --- |\n\
             | | **Method comments** | |\n\
             | method.1 | x | c1 |\n"
        );
    }

    #[test]
    fn pipes_and_newlines_are_escaped() {
        let rows = vec![SheetRow::Item {
            label: "1".into(),
            text: "a|b".into(),
            comment: "first\nsecond".into(),
        }];
        assert!(render(&rows).ends_with("| 1 | a\\|b | first<br>second |\n"));
    }
}
