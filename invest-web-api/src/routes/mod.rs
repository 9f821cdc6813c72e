use rocket::fairing::AdHoc;

pub mod account;
pub mod investment;
pub mod withdrawal;

pub fn mount() -> AdHoc {
    AdHoc::on_ignite("Attaching Routes", |rocket| async {
        rocket.mount(
            "/",
            routes![
                account::register,
                account::summary,
                investment::create,
                investment::submit_proof,
                investment::cancel,
                investment::decide,
                investment::complete_due,
                withdrawal::eligibility,
                withdrawal::create,
                withdrawal::cancel,
                withdrawal::process
            ],
        )
    })
}
