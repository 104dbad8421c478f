use crate::openai::{ChatMessage, ContentPart};

/// Output purity rules for the model
pub const OUTPUT_RULES: &str = "If a time and date is found, respond with valid text for ICS files, with nothing else before or after the valid ICS event file text. Do not include ```ics or ```.";

/// Literal layout the calendar event text must follow
pub const ICS_TEMPLATE: &str = "Always use this format: BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Parking Reminder//Parking Sign Reminder Generator//EN
METHOD:PUBLISH
CALSCALE:GREGORIAN
BEGIN:VEVENT
UID:parking-calendar@parking-reminder
DTSTAMP:XXXXXXTXXXXXXZ
DTSTART;TZID=America/New_York:XXXXXXTXXXXXXZ (30 mins before the start of the parking restriction)
DTEND;TZID=America/New_York:XXXXXXTXXXXXXZ (30 mins max duration)
SUMMARY:Move car before XX:XX
DESCRIPTION:Automated reminder to move car before parking restriction starts on XXXXXXX at XX:XX
STATUS:CONFIRMED
END:VEVENT
END:VCALENDAR";

const USER_INSTRUCTION_TEMPLATE: &str = "Assume US EASTERN TIME ZONE and include US EASTERN TIME ZONE in the ICS data, assume the next closest day after {today} (but not today), generate the text for an ICS file for 30 mins before the time of the start of the restriction to remind me to move the car before the parking restriction starts";

/// User instruction anchored to `today`
pub fn user_instruction(today: &str) -> String {
    USER_INSTRUCTION_TEMPLATE.replace("{today}", today)
}

/// Messages sent to the model: output rules, ICS template, then the user turn with the image
pub fn build_messages(today: &str, image_url: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(OUTPUT_RULES),
        ChatMessage::system(ICS_TEMPLATE),
        ChatMessage::user(vec![
            ContentPart::text(user_instruction(today)),
            ContentPart::image(image_url),
        ]),
    ]
}
