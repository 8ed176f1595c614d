//! Telegram bot front-end
//!
//! Long-polls Telegram with teloxide. Free text goes straight to the
//! consultant; the inline buttons turn into canned prompts. The "dates" and
//! "contact" buttons make the next text message from that chat an answer to
//! the question instead of a free-form one.

use crate::consultant::TourConsultant;
use crate::conversation::{ConversationKey, SenderInfo};
use crate::error::ChannelError;
use crate::format::truncate_chars;
use crate::leads::{Lead, LeadNotifier};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, User};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

pub const PLATFORM: &str = "Telegram";

/// Telegram rejects longer messages
const MAX_MESSAGE_CHARS: usize = 4096;

pub const APOLOGY: &str = "Kechirasiz, sizning so'rovingizni tushunmadim. Iltimos, boshqacha so'zlab ko'ring yoki /start buyrug'ini bosing 😊";

pub const CONTACT_MISSING: &str = "Iltimos, telefon raqamingizni yoki Telegram username-ingizni qoldiring. Masalan: +998901234567";

pub const CONTACT_RECEIVED: &str = "✅ *Ma'lumotlaringiz qabul qilindi!*\n\n\
Bizning mutaxassis maslahatchi 24 soat ichida siz bilan bog'lanadi va:\n\
• Sizga mos turlarni taklif qiladi\n\
• Batafsil dastur va narxlarni beradi\n\
• Barcha savollaringizga javob beradi\n\n\
Yangi sayohat uchun /start ni bosing!";

const INTERESTS_INTRO: &str = "Ajoyib! Sizning qiziqishlaringizni bilish uchun, quyidagi variantlardan sizga yoqqanlarini tanlang:\n\n\
Sizning sayohatda nimadan zavqlanishni xohlaysiz?";

const DESTINATIONS_INTRO: &str = "Bu yerda bizning eng mashhur yo'nalishlarimiz! Qaysi biri sizni qiziqtiradi?";

const CHAT_INTRO: &str = "Zo'r! Men sizning shaxsiy maslahatchi-ingiz sifatida bu yerda bo'laman.\n\n\
Menga sayohatga oid istalgan savol bering:\n\
• Qaysi mamlakatga bormoqchisiz?\n\
• Qancha muddat sayohat qilasiz?\n\
• Byudjetingiz qancha?\n\
• Nima uchun sayohat qilasiz?\n\n\
Yoki shunchaki 'Dubayga bormoqchiman' deb yozing - men barchasini tushunaman! 😊";

const BUDGET_QUESTION: &str = "Keling, byudjetingiz haqida gaplashamiz. Taxminan qancha pul sarf qilishni rejalashtiryapsiz?";

const DATES_QUESTION: &str = "Qachon sayohat qilmoqchisiz? \n\n\
Masalan: 'Sentyabr oyida' yoki '15-25 oktyabr' yoki 'Qish fasli' deb yozing.";

const CONTACT_QUESTION: &str = "Ajoyib! Sizga mos turlarni topish va batafsil ma'lumot berish uchun bog'lanish ma'lumotlaringizni qoldiring.\n\n\
Iltimos, quyidagicha yuboring:\n\n\
*Ism:* Sizning to'liq ismingiz\n\
*Telefon:* +998901234567\n\
*Izoh:* Qo'shimcha xohlagan narsalar\n\n\
Yoki shunchaki telefon raqamingizni yuboring - qolganini keyinroq aniqlaymiz!";

/// Button rows as `(label, callback data)`
pub type Layout = Vec<Vec<(&'static str, &'static str)>>;

pub fn welcome_text(first_name: Option<&str>) -> String {
    let name = first_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("traveler");
    format!(
        "👋 Salom {}! \n\n\
Men Aziza, sizning shaxsiy sayohat maslahatchi-ingizman! 8 yildan ortiq tajriba bilan O'zbekistondan jahon bo'ylab sayohatlar uyushtirib kelaman.\n\n\
Men sizga eng mos kelgan turni topishda yordam beraman va orzuingizdagi sayohatni amalga oshirish uchun har qanday savollaringizga javob beraman.\n\n\
Qaysi mamlakatga sayohat qilishni xohlaysiz? Yoki qiziqishlaringiz haqida gapirib bering - men sizga mukammal tavsiyalar beraman!\n\n\
Boshlash uchun pastdagi tugmalardan birini tanlang:",
        name
    )
}

pub fn welcome_layout() -> Layout {
    vec![
        vec![("🎯 Qiziqishlarim asosida tavsiya", "start_interests")],
        vec![("🗺️ Mashhur yo'nalishlar", "start_destinations")],
        vec![("💬 Maslahatchi bilan gaplashish", "start_chat")],
    ]
}

pub fn interests_layout() -> Layout {
    vec![
        vec![
            ("🏖️ Beach & Resort", "interest_beach"),
            ("🏛️ Culture & History", "interest_culture"),
        ],
        vec![
            ("🏔️ Adventure & Nature", "interest_adventure"),
            ("💎 Luxury & Shopping", "interest_luxury"),
        ],
        vec![
            ("👨‍👩‍👧‍👦 Family Friendly", "interest_family"),
            ("🍜 Food & Cuisine", "interest_food"),
        ],
        vec![
            ("💒 Romantic Getaway", "interest_romance"),
            ("🧘 Wellness & Spa", "interest_wellness"),
        ],
        vec![("✨ Surprise Me!", "interest_surprise")],
    ]
}

pub fn destinations_layout() -> Layout {
    vec![
        vec![("🇹🇷 Turkey", "dest_turkey"), ("🇦🇪 UAE (Dubai)", "dest_uae")],
        vec![("🇹🇭 Thailand", "dest_thailand"), ("🇲🇻 Maldives", "dest_maldives")],
        vec![("🇬🇪 Georgia", "dest_georgia"), ("🇪🇬 Egypt", "dest_egypt")],
        vec![("🤔 Not Sure Yet", "dest_recommendations")],
    ]
}

pub fn budget_layout() -> Layout {
    vec![
        vec![("💰 Budget (Under $500)", "budget_low")],
        vec![("💳 Mid-Range ($500-$1000)", "budget_mid")],
        vec![("💎 Luxury ($1000+)", "budget_high")],
        vec![("🤷‍♀️ I'm Flexible", "budget_flexible")],
    ]
}

pub fn keyboard(layout: &Layout) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(layout.iter().map(|row| {
        row.iter()
            .map(|(label, data)| InlineKeyboardButton::callback(*label, *data))
            .collect::<Vec<_>>()
    }))
}

/// What a button press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    ShowInterests,
    ShowDestinations,
    StartChat,
    Interest(&'static str),
    Destination(&'static str),
    Budget(&'static str),
    AskBudget,
    AskDates,
    ProvideContact,
}

impl CallbackAction {
    /// `None` for data no button produces
    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "start_interests" => Self::ShowInterests,
            "start_destinations" => Self::ShowDestinations,
            "start_chat" => Self::StartChat,
            "ask_budget" => Self::AskBudget,
            "ask_dates" => Self::AskDates,
            "provide_contact" => Self::ProvideContact,
            _ => {
                if let Some(interest) = data.strip_prefix("interest_") {
                    Self::Interest(interest_name(interest))
                } else if let Some(dest) = data.strip_prefix("dest_") {
                    Self::Destination(destination_name(dest))
                } else if let Some(budget) = data.strip_prefix("budget_") {
                    Self::Budget(budget_label(budget))
                } else {
                    return None;
                }
            }
        };
        Some(action)
    }

    /// Prompt sent to the consultant, for the buttons that ask it something
    pub fn prompt(&self) -> Option<String> {
        match self {
            Self::Interest(interest) => Some(format!(
                "I'm interested in {} travel. Can you recommend some destinations and tours for me?",
                interest
            )),
            Self::Destination("I need recommendations") => Some(
                "I'm not sure where to travel. Can you help me choose a destination based on popular options?"
                    .to_string(),
            ),
            Self::Destination(dest) => Some(format!(
                "I want to travel to {}. Can you show me available tours and tell me about this destination?",
                dest
            )),
            Self::Budget(label) => Some(format!(
                "My budget is {}. Please show me suitable tour options.",
                label
            )),
            _ => None,
        }
    }

    /// Buttons offered under the consultant's answer
    pub fn follow_up(&self) -> Option<(&'static str, Layout)> {
        match self {
            Self::Interest(_) => Some((
                "Qo'shimcha ma'lumot:",
                vec![
                    vec![("💰 Byudjet haqida gaplashish", "ask_budget")],
                    vec![("📞 Aloqa ma'lumotlarini berish", "provide_contact")],
                ],
            )),
            Self::Destination(_) => Some((
                "Qo'shimcha yordam:",
                vec![
                    vec![
                        ("💰 Narxlar haqida", "ask_budget"),
                        ("📅 Sanalar haqida", "ask_dates"),
                    ],
                    vec![("📞 Bog'lanish", "provide_contact")],
                ],
            )),
            Self::Budget(_) => Some((
                "Keyingi qadam:",
                vec![
                    vec![("📞 Bron qilish uchun bog'lanish", "provide_contact")],
                    vec![("🔄 Boshqa variantlar", "start_destinations")],
                ],
            )),
            _ => None,
        }
    }
}

fn interest_name(key: &str) -> &'static str {
    match key {
        "beach" => "beach",
        "culture" => "culture",
        "adventure" => "adventure",
        "luxury" => "luxury",
        "family" => "family",
        "food" => "food",
        "romance" => "romance",
        "wellness" => "wellness",
        "surprise" => "surprise",
        _ => "general",
    }
}

fn destination_name(key: &str) -> &'static str {
    match key {
        "turkey" => "Turkey",
        "uae" => "Dubai UAE",
        "thailand" => "Thailand",
        "maldives" => "Maldives",
        "georgia" => "Georgia",
        "egypt" => "Egypt",
        "recommendations" => "I need recommendations",
        _ => "general",
    }
}

fn budget_label(key: &str) -> &'static str {
    match key {
        "low" => "under $500 - budget friendly options",
        "mid" => "$500-$1000 - mid-range comfort",
        "high" => "over $1000 - luxury travel",
        _ => "flexible budget - show me best options",
    }
}

/// Buttons under an answer to a free-form message
pub fn general_follow_up() -> (&'static str, Layout) {
    (
        "Yordam kerakmi?",
        vec![vec![
            ("🎯 Tavsiyalar", "start_interests"),
            ("📞 Bog'lanish", "provide_contact"),
        ]],
    )
}

/// Buttons under an answer about travel dates
pub fn dates_follow_up() -> (&'static str, Layout) {
    (
        "Keyingi qadam:",
        vec![vec![
            ("📞 Bron qilish", "provide_contact"),
            ("💰 Narxlar haqida", "ask_budget"),
        ]],
    )
}

pub fn dates_prompt(text: &str) -> String {
    format!(
        "I want to travel in {}. Please show me available tours for these dates.",
        text.trim()
    )
}

static PHONE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\+?[\d\s\-\(\)]{10,20}").ok());

/// First phone-like run in `text` carrying at least seven digits
pub fn extract_phone(text: &str) -> Option<String> {
    let pattern = PHONE_PATTERN.as_ref()?;
    let candidate = pattern.find(text)?.as_str().trim();
    let digits = candidate.chars().filter(char::is_ascii_digit).count();
    (digits >= 7).then(|| candidate.to_string())
}

/// Inquiry prompt for a contact message, `None` when the customer cannot be reached
pub fn contact_prompt(sender: &SenderInfo, text: &str) -> Option<String> {
    let phone = extract_phone(text);
    let telegram = sender
        .username
        .as_deref()
        .map(|u| u.trim().trim_start_matches('@'))
        .filter(|u| !u.is_empty())
        .map(|u| format!("@{}", u));

    if phone.is_none() && telegram.is_none() {
        return None;
    }

    let name = sender
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Mijoz");

    Some(format!(
        "Please collect my contact information:\n\
Name: {}\n\
Phone: {}\n\
Telegram: {}\n\
Additional notes: {}\n\
I want to proceed with booking a tour.",
        name,
        phone.as_deref().unwrap_or("Not provided"),
        telegram.as_deref().unwrap_or("Not provided"),
        text.trim()
    ))
}

pub fn sender_info(user: Option<&User>) -> SenderInfo {
    match user {
        Some(user) => SenderInfo {
            name: Some(user.first_name.clone()).filter(|n| !n.trim().is_empty()),
            username: user.username.clone(),
            ..SenderInfo::default()
        },
        None => SenderInfo::default(),
    }
}

pub fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    command == "/start" || command.starts_with("/start@")
}

/// Question a chat is currently answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Awaiting {
    Dates,
    Contact,
}

/// Per-chat waiting state, kept for the process lifetime
#[derive(Debug, Clone, Default)]
pub struct ChatStates {
    inner: Arc<RwLock<HashMap<i64, Awaiting>>>,
}

impl ChatStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, chat_id: i64, awaiting: Awaiting) {
        self.inner.write().await.insert(chat_id, awaiting);
    }

    /// Remove and return the state
    pub async fn take(&self, chat_id: i64) -> Option<Awaiting> {
        self.inner.write().await.remove(&chat_id)
    }

    pub async fn get(&self, chat_id: i64) -> Option<Awaiting> {
        self.inner.read().await.get(&chat_id).copied()
    }
}

struct BotState {
    consultant: Arc<TourConsultant>,
    chats: ChatStates,
}

impl BotState {
    /// Run the consultant for a Telegram user
    async fn consult(&self, user_id: i64, text: &str, sender: &SenderInfo) -> Option<String> {
        let key = ConversationKey::telegram(user_id);
        match self
            .consultant
            .reply(&key, text, sender, Some(PLATFORM))
            .await
        {
            Ok(reply) if !reply.trim().is_empty() => Some(truncate_chars(&reply, MAX_MESSAGE_CHARS)),
            Ok(_) => None,
            Err(e) => {
                error!(conversation = %key, error = %e, "Consultant failed on Telegram message");
                None
            }
        }
    }
}

/// Long-polling bot wired to the consultant
pub struct TelegramBot {
    bot: Bot,
    state: Arc<BotState>,
}

impl TelegramBot {
    pub fn new(bot: Bot, consultant: Arc<TourConsultant>) -> Self {
        Self {
            bot,
            state: Arc::new(BotState {
                consultant,
                chats: ChatStates::new(),
            }),
        }
    }

    /// Poll until interrupted
    pub async fn run(self) {
        info!("Telegram tour consultant bot starting");

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_callback_query().endpoint(on_callback));

        Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![self.state])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram bot stopped");
    }
}

fn user_key(user: Option<&User>, chat_id: ChatId) -> i64 {
    user.and_then(|u| i64::try_from(u.id.0).ok())
        .unwrap_or(chat_id.0)
}

async fn send_buttons(bot: &Bot, chat_id: ChatId, (text, layout): (&str, Layout)) -> ResponseResult<()> {
    bot.send_message(chat_id, text)
        .reply_markup(keyboard(&layout))
        .await?;
    Ok(())
}

async fn on_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let sender = sender_info(msg.from());

    if is_start_command(text) {
        state.chats.take(chat_id.0).await;
        bot.send_message(chat_id, welcome_text(sender.name.as_deref()))
            .reply_markup(keyboard(&welcome_layout()))
            .await?;
        return Ok(());
    }

    let awaiting = state.chats.take(chat_id.0).await;
    let prompt = match awaiting {
        Some(Awaiting::Dates) => dates_prompt(text),
        Some(Awaiting::Contact) => match contact_prompt(&sender, text) {
            Some(prompt) => prompt,
            None => {
                state.chats.set(chat_id.0, Awaiting::Contact).await;
                bot.send_message(chat_id, CONTACT_MISSING).await?;
                return Ok(());
            }
        },
        None => text.to_string(),
    };

    let user_id = user_key(msg.from(), chat_id);
    let Some(reply) = state.consult(user_id, &prompt, &sender).await else {
        bot.send_message(chat_id, APOLOGY).await?;
        return Ok(());
    };

    bot.send_message(chat_id, reply).await?;
    match awaiting {
        Some(Awaiting::Dates) => send_buttons(&bot, chat_id, dates_follow_up()).await?,
        Some(Awaiting::Contact) => {
            bot.send_message(chat_id, CONTACT_RECEIVED)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        None => send_buttons(&bot, chat_id, general_follow_up()).await?,
    }
    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    let action = q.data.as_deref().and_then(CallbackAction::parse);
    let origin = q.message.as_ref().map(|m| (m.chat.id, m.id));
    let chat_id = origin
        .map(|(chat, _)| chat)
        .unwrap_or_else(|| ChatId(user_key(Some(&q.from), ChatId(0))));

    let Some(action) = action else {
        warn!(data = ?q.data, "Unknown Telegram callback");
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };

    // Replaces the pressed message when there is one, otherwise posts anew
    let show = |text: String, layout: Option<Layout>| {
        let bot = bot.clone();
        async move {
            match origin {
                Some((chat, message_id)) => {
                    let mut request = bot.edit_message_text(chat, message_id, text);
                    if let Some(layout) = layout {
                        request = request.reply_markup(keyboard(&layout));
                    }
                    request.await?;
                }
                None => {
                    let mut request = bot.send_message(chat_id, text);
                    if let Some(layout) = layout {
                        request = request.reply_markup(keyboard(&layout));
                    }
                    request.await?;
                }
            }
            ResponseResult::Ok(())
        }
    };

    match action {
        CallbackAction::ShowInterests => {
            show(INTERESTS_INTRO.to_string(), Some(interests_layout())).await?
        }
        CallbackAction::ShowDestinations => {
            show(DESTINATIONS_INTRO.to_string(), Some(destinations_layout())).await?
        }
        CallbackAction::StartChat => show(CHAT_INTRO.to_string(), None).await?,
        CallbackAction::AskBudget => {
            bot.send_message(chat_id, BUDGET_QUESTION)
                .reply_markup(keyboard(&budget_layout()))
                .await?;
        }
        CallbackAction::AskDates => {
            state.chats.set(chat_id.0, Awaiting::Dates).await;
            bot.send_message(chat_id, DATES_QUESTION).await?;
        }
        CallbackAction::ProvideContact => {
            state.chats.set(chat_id.0, Awaiting::Contact).await;
            bot.send_message(chat_id, CONTACT_QUESTION)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        CallbackAction::Interest(_) | CallbackAction::Destination(_) | CallbackAction::Budget(_) => {
            let prompt = action.prompt().unwrap_or_default();
            let sender = sender_info(Some(&q.from));
            let user_id = user_key(Some(&q.from), chat_id);
            match state.consult(user_id, &prompt, &sender).await {
                Some(reply) => {
                    show(reply, None).await?;
                    if let Some(follow_up) = action.follow_up() {
                        send_buttons(&bot, chat_id, follow_up).await?;
                    }
                }
                None => show(APOLOGY.to_string(), None).await?,
            }
        }
    }

    bot.answer_callback_query(q.id).await?;
    Ok(())
}

/// Posts new lead summaries to the sales team's chat
pub struct TelegramLeadNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramLeadNotifier {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl LeadNotifier for TelegramLeadNotifier {
    async fn notify(&self, lead: &Lead) -> Result<(), ChannelError> {
        self.bot
            .send_message(self.chat_id, lead.summary())
            .await
            .map_err(|e| ChannelError::Delivery {
                channel: "telegram",
                reason: e.to_string(),
            })?;
        info!(lead_id = %lead.id, "Lead forwarded to Telegram");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(name: Option<&str>, username: Option<&str>) -> SenderInfo {
        SenderInfo {
            name: name.map(String::from),
            username: username.map(String::from),
            ..SenderInfo::default()
        }
    }

    #[test]
    fn test_callback_parsing() {
        assert_eq!(
            CallbackAction::parse("start_interests"),
            Some(CallbackAction::ShowInterests)
        );
        assert_eq!(
            CallbackAction::parse("dest_uae"),
            Some(CallbackAction::Destination("Dubai UAE"))
        );
        assert_eq!(
            CallbackAction::parse("interest_unknown"),
            Some(CallbackAction::Interest("general"))
        );
        assert_eq!(CallbackAction::parse("something_else"), None);
    }

    #[test]
    fn test_callback_prompts() {
        let prompt = CallbackAction::parse("dest_uae").and_then(|a| a.prompt()).unwrap();
        assert!(prompt.starts_with("I want to travel to Dubai UAE."));

        let prompt = CallbackAction::parse("dest_recommendations")
            .and_then(|a| a.prompt())
            .unwrap();
        assert!(prompt.starts_with("I'm not sure where to travel."));

        let prompt = CallbackAction::parse("budget_low").and_then(|a| a.prompt()).unwrap();
        assert_eq!(
            prompt,
            "My budget is under $500 - budget friendly options. Please show me suitable tour options."
        );

        assert!(CallbackAction::AskDates.prompt().is_none());
    }

    #[test]
    fn test_every_button_parses() {
        let layouts = [
            welcome_layout(),
            interests_layout(),
            destinations_layout(),
            budget_layout(),
            general_follow_up().1,
            dates_follow_up().1,
        ];
        for layout in layouts {
            for (label, data) in layout.into_iter().flatten() {
                assert!(CallbackAction::parse(data).is_some(), "{} -> {}", label, data);
            }
        }
    }

    #[test]
    fn test_keyboard_layout() {
        let markup = keyboard(&interests_layout());
        let widths: Vec<usize> = markup.inline_keyboard.iter().map(Vec::len).collect();
        assert_eq!(widths, vec![2, 2, 2, 2, 1]);
    }

    #[test]
    fn test_extract_phone() {
        assert_eq!(
            extract_phone("Ism: Ali, tel +998 90 123 45 67").as_deref(),
            Some("+998 90 123 45 67")
        );
        assert_eq!(extract_phone("+998901234567").as_deref(), Some("+998901234567"));
        assert_eq!(extract_phone("call me tomorrow"), None);
    }

    #[test]
    fn test_contact_prompt_requires_reachability() {
        assert!(contact_prompt(&sender(Some("Ali"), None), "no numbers here").is_none());

        let prompt = contact_prompt(&sender(None, Some("ali_travels")), "hello").unwrap();
        assert!(prompt.contains("Name: Mijoz"));
        assert!(prompt.contains("Phone: Not provided"));
        assert!(prompt.contains("Telegram: @ali_travels"));

        let prompt = contact_prompt(&sender(Some("Ali"), None), "+998901234567 evening").unwrap();
        assert!(prompt.contains("Phone: +998901234567"));
        assert!(prompt.ends_with("I want to proceed with booking a tour."));
    }

    #[test]
    fn test_start_command() {
        assert!(is_start_command("/start"));
        assert!(is_start_command("/start@safar_bot payload"));
        assert!(!is_start_command("/started"));
        assert!(!is_start_command("start"));
    }

    #[test]
    fn test_welcome_uses_first_name() {
        assert!(welcome_text(Some("Dilnoza")).starts_with("👋 Salom Dilnoza!"));
        assert!(welcome_text(None).starts_with("👋 Salom traveler!"));
    }

    #[tokio::test]
    async fn test_chat_states_take_clears() {
        let states = ChatStates::new();
        states.set(7, Awaiting::Dates).await;
        assert_eq!(states.get(7).await, Some(Awaiting::Dates));
        assert_eq!(states.take(7).await, Some(Awaiting::Dates));
        assert_eq!(states.take(7).await, None);
    }

    #[test]
    fn test_dates_prompt() {
        assert_eq!(
            dates_prompt(" Sentyabr oyida "),
            "I want to travel in Sentyabr oyida. Please show me available tours for these dates."
        );
    }
}
