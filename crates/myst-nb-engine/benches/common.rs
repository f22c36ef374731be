const HEADER: &str = "---\njupytext:\n  text_representation:\n    format_name: myst\nkernelspec:\n  name: python3\n  display_name: Python 3\n---\n\n";

#[allow(dead_code)]
pub fn generate_notebook(cells: usize) -> String {
    let mut content = String::from(HEADER);

    for cell in 0..cells {
        content.push_str(&format!("## Step {cell}\n\nSome prose describing the step.\n\n"));
        content.push_str(&format!(
            "```{{code-cell}} ipython3\n:tags: [step-{cell}]\n\nx = {cell}\nprint(x)\n```\n\n"
        ));
        if cell % 5 == 0 {
            content.push_str("+++ {\"slideshow\": {\"slide_type\": \"slide\"}}\n\n");
        }
    }

    content
}

#[allow(dead_code)]
pub fn generate_nested_notebook(items: usize) -> String {
    let mut content = String::from(HEADER);

    for item in 0..items {
        content.push_str(&format!(
            "- Item {item}\n\n  ```{{code-cell}}\n  nested = {item}\n  ```\n\n> ```{{raw-cell}}\n> quoted\n> ```\n\n"
        ));
    }

    content
}
