//! Instruction templates.
//!
//! Placeholders are written `{{name}}` and filled by [`render`].

/// Classifier instructions framed as an explicit rule list.
pub const HEURISTIC_TEMPLATE: &str = r#"You are a reading assistant tasked with finding noteworthy differences between versions of a Wikipedia article.
You have two versions of the introduction of an article: an old version and a new version.
Decide whether the differences between them are noteworthy, and explain your decision in one sentence.
If there are no noteworthy differences, summarize what little changed (or say that nothing changed).

These differences are noteworthy:
    - Different people, organizations or places mentioned
    - Changes to dates, numbers or major events
    - A new or removed claim that a reader would care about
    - Substantially different analysis or conclusion about the same topic

These differences are not noteworthy:
    - Changes to grammar, spelling, punctuation or minor word choice
    - Different structure or ordering with the same meaning
    - Added or removed citations, links or formatting
    - Deeper analysis of the same topic that reaches the same conclusion

Respond with JSON containing "noteworthy" (true or false) and "rationale" (one sentence).

<old_revision>
{{old_revision}}
</old_revision>

<new_revision>
{{new_revision}}
</new_revision>
"#;

/// Classifier instructions framed as worked examples.
pub const FEWSHOT_TEMPLATE: &str = r#"You compare two versions of the introduction of a Wikipedia article and decide whether a reader of the old version would miss something important.
Answer with JSON containing "noteworthy" (true or false) and "rationale" (one sentence).

Example 1
Old: "The company is headquartered in Austin, Texas, and employs 1,200 people."
New: "The company is headquartered in Denver, Colorado, and employs 1,200 people."
Answer: {"noteworthy": true, "rationale": "The headquarters moved from Austin to Denver."}

Example 2
Old: "She is an American novelist, known for her debut novel The Quiet Field."
New: "She is an American novelist who is best known for her debut novel, The Quiet Field."
Answer: {"noteworthy": false, "rationale": "The sentence was reworded without changing its meaning."}

Example 3
Old: "The bridge opened in 1932."
New: "The bridge opened in 1932. It was closed indefinitely in March 2025 after structural damage was found."
Answer: {"noteworthy": true, "rationale": "The new version reports that the bridge has been closed."}

Example 4
Old: "The river flows through three countries[1] and is 880 km long."
New: "The river flows through three countries and is 880 kilometres (550 mi) long.[2]"
Answer: {"noteworthy": false, "rationale": "Only citations and unit formatting changed."}

Now compare these versions.

<old_revision>
{{old_revision}}
</old_revision>

<new_revision>
{{new_revision}}
</new_revision>
"#;

/// Arbiter instructions. `{{alignment}}` is empty for unaligned runs.
pub const ARBITER_TEMPLATE: &str = r#"You are the judge in a review of changes to a Wikipedia article introduction.
Two analysts each compared an old and a new version and wrote a one-sentence rationale.
Decide whether the differences are noteworthy.

When both rationales reach the same conclusion, accept it unless the texts give you strong evidence that it is wrong.
When the rationales disagree, read both versions and decide independently.
{{alignment}}
Respond with JSON containing "noteworthy" (true or false) and "reasoning" (one sentence).

<old_revision>
{{old_revision}}
</old_revision>

<new_revision>
{{new_revision}}
</new_revision>

<rationale_1>
{{rationale_1}}
</rationale_1>

<rationale_2>
{{rationale_2}}
</rationale_2>
"#;

/// Hand-written guidance used by the `aligned-fewshot` mode.
pub const ALIGNED_FEWSHOT_FRAGMENT: &str = r#"
Guidance from human reviewers:
    - A change in who, where or when is noteworthy even if it is a single word.
    - A new fact about the current status of the subject (death, closure, election, merger) is noteworthy.
    - Rewording, reordering and copy-editing are not noteworthy, even when the change is long.
    - Adding detail that supports what the old version already said is not noteworthy.
    - If one analyst only summarizes the article without naming a concrete change, give its rationale less weight.
"#;

/// Instructions for producing the next alignment round from reviewed examples.
pub const ALIGNMENT_UPDATE_TEMPLATE: &str = r#"You maintain a short block of guidance for an AI judge that decides whether changes to Wikipedia article introductions are noteworthy.
Below is the current guidance, followed by recent cases. Each case lists the rationales of two models, the judge's reasoning, and the human reviewer's verdict.

Rewrite the guidance so the judge would agree with the human reviewers more often.
Keep rules that still hold, generalize from the cases rather than quoting them, and keep the result under 300 words.
Return only the new guidance text.

<current_guidance>
{{alignment_text}}
</current_guidance>

<cases>
{{examples_text}}
</cases>
"#;

/// Replaces every `{{name}}` in `template` with its value in one pass.
///
/// Substituted values are never rescanned, so article text containing a
/// placeholder is inserted literally. Unknown placeholders are kept as-is.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                match values.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
