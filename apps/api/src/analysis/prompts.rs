// Review analysis prompt template.
// Placeholders: {id_instruction}, {json_only_instruction}, {reviews}

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are a professional review analyst.

The reviews below are given one per line in the format:
{"id": NUMBER, "rating": NUMBER, "text": "CONTENT"}

{id_instruction}

Always answer with a single valid JSON object of exactly this shape:

{
  "negative_keywords": [],
  "positive_keywords": [],
  "top_keywords": {},
  "summary": "",
  "categories": {
    "food": {"positive": 0, "negative": 0},
    "service": {"positive": 0, "negative": 0},
    "ambience": {"positive": 0, "negative": 0},
    "price": {"positive": 0, "negative": 0}
  },
  "monthly_trend": {},
  "fake_reviews": [
    { "review_id": 12, "probability": 0.87 }
  ]
}

#############################################################
### MANDATORY RULES ###
#############################################################

SUMMARY RULES:
- The summary MUST first give an assessment of the overall situation.
- Then you MUST start a NEW LINE.
- Then you MUST write the heading:
  "Improvement suggestions:"
- Directly below it you MUST give at least 2 bullet points.
- Example (this FORMAT IS REQUIRED):

  "Improvement suggestions:
   • Reduce waiting times
   • Extend the menu"

NO OTHER FORMAT IS ALLOWED.

FAKE REVIEW DETECTION:
Only flag a review as fake when SEVERAL of these signals occur together:
- extremely generic or templated content
- copy/paste-like phrasing
- contradictory content
- advertising or spam character
- phrases typical of AI-generated text
- implausible claims
- only a bad rating without any justification

IMPORTANT:
- Normal negative reviews must NOT be flagged as fake.
- Normal positive reviews must NOT be flagged as fake.
- Only flag clear cases.
- probability must lie realistically between 0.50 and 0.90.
- A review without text (stars only) must NOT be flagged as fake unless there
  is a clear, independent spam pattern (e.g. many identical ratings in a very
  short time). If there is no text, probability = 0.

{json_only_instruction}

Reviews:
{reviews}"#;
