// * Outreach email templates, selected by opportunity type

use crate::model::MentionType;

/// Names used to fill a template
#[derive(Debug, Clone, Copy)]
pub struct OutreachContext<'a> {
    pub brand: &'a str,
    pub domain: &'a str,
    pub source_domain: &'a str,
}

pub fn mention_template(mention_type: MentionType, ctx: &OutreachContext<'_>) -> String {
    let (subject, opener) = match mention_type {
        MentionType::Forum => (
            format!("Thanks for bringing up {} in the discussion", ctx.brand),
            format!(
                "I came across the thread on {} where {} was mentioned, and really appreciated it.",
                ctx.source_domain, ctx.brand
            ),
        ),
        MentionType::Blog => (
            format!("Thanks for writing about {}", ctx.brand),
            format!(
                "I just read your post on {} that mentions {}. Thank you for including us!",
                ctx.source_domain, ctx.brand
            ),
        ),
        MentionType::Review => (
            format!("Thank you for reviewing {}", ctx.brand),
            format!(
                "Thanks for taking the time to review {} on {}. Feedback like yours helps us improve.",
                ctx.brand, ctx.source_domain
            ),
        ),
        MentionType::News => (
            format!("Quick note about your {} mention", ctx.brand),
            format!(
                "Thank you for featuring {} in your recent coverage on {}.",
                ctx.brand, ctx.source_domain
            ),
        ),
    };

    format!(
        "Subject: {}\n\nHi there,\n\n{}\n\nWould you consider linking the mention to https://{} so readers can find us easily? \
         Happy to share extra details or assets if that helps.\n\nBest regards,\nThe {} team",
        subject, opener, ctx.domain, ctx.brand
    )
}

pub fn broken_link_template(ctx: &OutreachContext<'_>, broken_url: &str) -> String {
    format!(
        "Subject: Broken link on {}\n\nHi there,\n\nWhile browsing {} I noticed a link to {} that no longer works. \
         We have a resource on https://{} covering the same topic that could serve as a replacement.\n\n\
         Thanks for keeping your page in great shape!\n\nBest regards,\nThe {} team",
        ctx.source_domain, ctx.source_domain, broken_url, ctx.domain, ctx.brand
    )
}

pub fn competitor_gap_template(ctx: &OutreachContext<'_>, competitors: &[String]) -> String {
    let linked = if competitors.is_empty() {
        "similar tools".to_string()
    } else {
        competitors.join(", ")
    };
    format!(
        "Subject: A resource for your readers on {}\n\nHi there,\n\nI noticed {} already references {}. \
         {} (https://{}) covers the same space and might be a useful addition for your readers.\n\n\
         Happy to send over more details.\n\nBest regards,\nThe {} team",
        ctx.source_domain, ctx.source_domain, linked, ctx.brand, ctx.domain, ctx.brand
    )
}
