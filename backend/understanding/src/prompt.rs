//! The fixed instruction sent with every image.
//!
//! Built from the contract vocabularies, so the labels the model is offered
//! are exactly the labels the validator accepts.

use propscope_core::{FeatureSet, ExteriorFeatures, InteriorFeatures, LocationType};

const TASK: &str = "You are reviewing a property photograph for an insurance underwriter.

Step 1. Decide whether the photo shows an interior room or an exterior area such as a garden.

Step 2. Choose the space type from the list for that location. If the scene does not clearly \
match one entry, or you cannot tell with confidence, use the \"Other\" entry for that location.";

const FLAGS: &str = "Step 3. Report every risk flag listed for the detected location, and only those. \
A flag is true only when the condition is present and visibly confirmable in the photo. \
Otherwise it is false. Under any uncertainty, answer false.";

const FORMAT: &str = "Respond with exactly one JSON object and nothing else: no commentary, no Markdown.
{
  \"locationType\": \"interior\" | \"exterior\",
  \"spaceType\": \"<one space type from the list above>\",
  \"features\": { \"<flag>\": true | false }
}";

/// Render the instruction text.
pub fn instruction() -> String {
    let mut sections = vec![TASK.to_string()];

    for location in LocationType::ALL {
        sections.push(bullets(
            &format!("{} space types:", capitalize(location.as_str())),
            location.space_labels(),
        ));
    }

    sections.push(FLAGS.to_string());
    sections.push(bullets(
        "Interior flags (only when locationType is \"interior\"):",
        InteriorFeatures::KEYS,
    ));
    sections.push(bullets(
        "Exterior flags (only when locationType is \"exterior\"):",
        ExteriorFeatures::KEYS,
    ));

    sections.push(FORMAT.to_string());
    sections.join("\n\n")
}

fn bullets(heading: &str, items: &[&str]) -> String {
    let mut out = heading.to_string();
    for item in items {
        out.push_str("\n- ");
        out.push_str(item);
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
