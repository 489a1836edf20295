use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HatOp {
    WhenFlagClicked,
    WhenBroadcastReceived,
    StartAsClone,
    ProcedureDefinition,
    WhenThisSpriteClicked,
    WhenStageClicked,
    WhenKeyPressed,
    WhenBackdropSwitchesTo,
    WhenGreaterThan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementOp {
    MoveSteps,
    GoToXY,
    GoTo,
    ChangeXBy,
    ChangeYBy,
    SetX,
    SetY,
    TurnLeft,
    TurnRight,
    PointTowards,
    PointInDirection,
    SetRotationStyle,
    GlideSecsToXY,
    GlideTo,
    SwitchCostumeTo,
    SwitchBackdropTo,
    NextCostume,
    NextBackdrop,
    ChangeEffectBy,
    SetEffectTo,
    ClearGraphicEffects,
    ChangeSizeBy,
    SetSizeTo,
    Show,
    Hide,
    GoToFrontBack,
    SayForSecs,
    Wait,
    Forever,
    Repeat,
    RepeatUntil,
    WaitUntil,
    If,
    IfElse,
    CreateCloneOf,
    DeleteThisClone,
    SetVariableTo,
    ChangeVariableBy,
    AddToList,
    DeleteOfList,
    DeleteAllOfList,
    InsertAtList,
    ReplaceItemOfList,
    Broadcast,
    BroadcastAndWait,
    ProcedureCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReporterOp {
    And,
    Or,
    Not,
    Equals,
    Gt,
    Lt,
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    Round,
    Random,
    MathOp,
    Join,
    Contains,
    Length,
    LetterOf,
    XPosition,
    YPosition,
    Direction,
    MouseX,
    MouseY,
    MouseDown,
    KeyPressed,
    TouchingObject,
    Size,
    CostumeNumberName,
    BackdropNumberName,
    Variable,
    ListContents,
    ItemOfList,
    ItemNumOfList,
    ListContainsItem,
    LengthOfList,
    ArgumentStringNumber,
    ArgumentBoolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuOp {
    GoToMenu,
    GlideToMenu,
    PointTowardsMenu,
    Costume,
    Backdrops,
    KeyOptions,
    TouchingObjectMenu,
    CloneOfMenu,
    BroadcastMenu,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Opcode {
    Hat(HatOp),
    Statement(StatementOp),
    Reporter(ReporterOp),
    Menu(MenuOp),
    Prototype,
    Unknown(String),
}

const HATS: &[(&str, HatOp)] = &[
    ("event_whenflagclicked", HatOp::WhenFlagClicked),
    ("event_whenbroadcastreceived", HatOp::WhenBroadcastReceived),
    ("control_start_as_clone", HatOp::StartAsClone),
    ("procedures_definition", HatOp::ProcedureDefinition),
    ("event_whenthisspriteclicked", HatOp::WhenThisSpriteClicked),
    ("event_whenstageclicked", HatOp::WhenStageClicked),
    ("event_whenkeypressed", HatOp::WhenKeyPressed),
    ("event_whenbackdropswitchesto", HatOp::WhenBackdropSwitchesTo),
    ("event_whengreaterthan", HatOp::WhenGreaterThan),
];

const STATEMENTS: &[(&str, StatementOp)] = &[
    ("motion_movesteps", StatementOp::MoveSteps),
    ("motion_gotoxy", StatementOp::GoToXY),
    ("motion_goto", StatementOp::GoTo),
    ("motion_changexby", StatementOp::ChangeXBy),
    ("motion_changeyby", StatementOp::ChangeYBy),
    ("motion_setx", StatementOp::SetX),
    ("motion_sety", StatementOp::SetY),
    ("motion_turnleft", StatementOp::TurnLeft),
    ("motion_turnright", StatementOp::TurnRight),
    ("motion_pointtowards", StatementOp::PointTowards),
    ("motion_pointindirection", StatementOp::PointInDirection),
    ("motion_setrotationstyle", StatementOp::SetRotationStyle),
    ("motion_glidesecstoxy", StatementOp::GlideSecsToXY),
    ("motion_glideto", StatementOp::GlideTo),
    ("looks_switchcostumeto", StatementOp::SwitchCostumeTo),
    ("looks_switchbackdropto", StatementOp::SwitchBackdropTo),
    ("looks_nextcostume", StatementOp::NextCostume),
    ("looks_nextbackdrop", StatementOp::NextBackdrop),
    ("looks_changeeffectby", StatementOp::ChangeEffectBy),
    ("looks_seteffectto", StatementOp::SetEffectTo),
    ("looks_cleargraphiceffects", StatementOp::ClearGraphicEffects),
    ("looks_changesizeby", StatementOp::ChangeSizeBy),
    ("looks_setsizeto", StatementOp::SetSizeTo),
    ("looks_show", StatementOp::Show),
    ("looks_hide", StatementOp::Hide),
    ("looks_gotofrontback", StatementOp::GoToFrontBack),
    ("looks_sayforsecs", StatementOp::SayForSecs),
    ("control_wait", StatementOp::Wait),
    ("control_forever", StatementOp::Forever),
    ("control_repeat", StatementOp::Repeat),
    ("control_repeat_until", StatementOp::RepeatUntil),
    ("control_wait_until", StatementOp::WaitUntil),
    ("control_if", StatementOp::If),
    ("control_if_else", StatementOp::IfElse),
    ("control_create_clone_of", StatementOp::CreateCloneOf),
    ("control_delete_this_clone", StatementOp::DeleteThisClone),
    ("data_setvariableto", StatementOp::SetVariableTo),
    ("data_changevariableby", StatementOp::ChangeVariableBy),
    ("data_addtolist", StatementOp::AddToList),
    ("data_deleteoflist", StatementOp::DeleteOfList),
    ("data_deletealloflist", StatementOp::DeleteAllOfList),
    ("data_insertatlist", StatementOp::InsertAtList),
    ("data_replaceitemoflist", StatementOp::ReplaceItemOfList),
    ("event_broadcast", StatementOp::Broadcast),
    ("event_broadcastandwait", StatementOp::BroadcastAndWait),
    ("procedures_call", StatementOp::ProcedureCall),
];

const REPORTERS: &[(&str, ReporterOp)] = &[
    ("operator_and", ReporterOp::And),
    ("operator_or", ReporterOp::Or),
    ("operator_not", ReporterOp::Not),
    ("operator_equals", ReporterOp::Equals),
    ("operator_gt", ReporterOp::Gt),
    ("operator_lt", ReporterOp::Lt),
    ("operator_add", ReporterOp::Add),
    ("operator_subtract", ReporterOp::Subtract),
    ("operator_multiply", ReporterOp::Multiply),
    ("operator_divide", ReporterOp::Divide),
    ("operator_mod", ReporterOp::Mod),
    ("operator_round", ReporterOp::Round),
    ("operator_random", ReporterOp::Random),
    ("operator_mathop", ReporterOp::MathOp),
    ("operator_join", ReporterOp::Join),
    ("operator_contains", ReporterOp::Contains),
    ("operator_length", ReporterOp::Length),
    ("operator_letter_of", ReporterOp::LetterOf),
    ("motion_xposition", ReporterOp::XPosition),
    ("motion_yposition", ReporterOp::YPosition),
    ("motion_direction", ReporterOp::Direction),
    ("sensing_mousex", ReporterOp::MouseX),
    ("sensing_mousey", ReporterOp::MouseY),
    ("sensing_mousedown", ReporterOp::MouseDown),
    ("sensing_keypressed", ReporterOp::KeyPressed),
    ("sensing_touchingobject", ReporterOp::TouchingObject),
    ("looks_size", ReporterOp::Size),
    ("looks_costumenumbername", ReporterOp::CostumeNumberName),
    ("looks_backdropnumbername", ReporterOp::BackdropNumberName),
    ("data_variable", ReporterOp::Variable),
    ("data_listcontents", ReporterOp::ListContents),
    ("data_itemoflist", ReporterOp::ItemOfList),
    ("data_itemnumoflist", ReporterOp::ItemNumOfList),
    ("data_listcontainsitem", ReporterOp::ListContainsItem),
    ("data_lengthoflist", ReporterOp::LengthOfList),
    ("argument_reporter_string_number", ReporterOp::ArgumentStringNumber),
    ("argument_reporter_boolean", ReporterOp::ArgumentBoolean),
];

const MENUS: &[(&str, MenuOp)] = &[
    ("motion_goto_menu", MenuOp::GoToMenu),
    ("motion_glideto_menu", MenuOp::GlideToMenu),
    ("motion_pointtowards_menu", MenuOp::PointTowardsMenu),
    ("looks_costume", MenuOp::Costume),
    ("looks_backdrops", MenuOp::Backdrops),
    ("sensing_keyoptions", MenuOp::KeyOptions),
    ("sensing_touchingobjectmenu", MenuOp::TouchingObjectMenu),
    ("control_create_clone_of_menu", MenuOp::CloneOfMenu),
    ("event_broadcast_menu", MenuOp::BroadcastMenu),
];

const PROTOTYPE: &str = "procedures_prototype";

const STRAY_BLOCK_FAMILIES: &[&str] = &[
    "motion_",
    "looks_",
    "sound_",
    "control_",
    "sensing_",
    "operator_",
    "data_",
    "procedures_",
    "argument_",
];

fn lookup<T: Copy>(table: &[(&'static str, T)], name: &str) -> Option<T> {
    table.iter().find(|(n, _)| *n == name).map(|(_, op)| *op)
}

fn name_of<T: Copy + PartialEq>(table: &[(&'static str, T)], op: T) -> &'static str {
    table
        .iter()
        .find(|(_, candidate)| *candidate == op)
        .map(|(n, _)| *n)
        .unwrap_or("unknown")
}

impl Opcode {
    pub fn from_name(name: &str) -> Self {
        if let Some(op) = lookup(STATEMENTS, name) {
            return Opcode::Statement(op);
        }
        if let Some(op) = lookup(REPORTERS, name) {
            return Opcode::Reporter(op);
        }
        if let Some(op) = lookup(HATS, name) {
            return Opcode::Hat(op);
        }
        if let Some(op) = lookup(MENUS, name) {
            return Opcode::Menu(op);
        }
        if name == PROTOTYPE {
            return Opcode::Prototype;
        }
        Opcode::Unknown(name.to_string())
    }

    pub fn name(&self) -> &str {
        match self {
            Opcode::Hat(op) => name_of(HATS, *op),
            Opcode::Statement(op) => name_of(STATEMENTS, *op),
            Opcode::Reporter(op) => name_of(REPORTERS, *op),
            Opcode::Menu(op) => name_of(MENUS, *op),
            Opcode::Prototype => PROTOTYPE,
            Opcode::Unknown(name) => name,
        }
    }

    pub fn is_stray_block_family(&self) -> bool {
        let name = self.name();
        STRAY_BLOCK_FAMILIES
            .iter()
            .any(|prefix| name.starts_with(prefix))
    }
}

impl MenuOp {
    pub fn field_name(self) -> &'static str {
        match self {
            MenuOp::GoToMenu | MenuOp::GlideToMenu => "TO",
            MenuOp::PointTowardsMenu => "TOWARDS",
            MenuOp::Costume => "COSTUME",
            MenuOp::Backdrops => "BACKDROP",
            MenuOp::KeyOptions => "KEY_OPTION",
            MenuOp::TouchingObjectMenu => "TOUCHINGOBJECTMENU",
            MenuOp::CloneOfMenu => "CLONE_OPTION",
            MenuOp::BroadcastMenu => "BROADCAST_OPTION",
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
