/// Rights recitation, spoken one line at a time
pub(super) const RIGHTS_SCRIPT: [&str; 4] = [
    "You have the right to remain silent.",
    "Anything you say can be used against you in court.",
    "You have the right to an attorney.",
    "If you cannot afford an attorney, one will be appointed for you.",
];
