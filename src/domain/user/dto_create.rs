/// Everything needed to insert a user. Only ever built after the
/// registration rules passed and the password was hashed.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub hashed_password: String,
}
